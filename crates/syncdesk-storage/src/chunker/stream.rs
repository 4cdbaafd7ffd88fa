//! Lazy chunk iterator over an open file.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};

use bytes::Bytes;
use fastcdc::v2020::StreamCDC;
use sha2::{Digest, Sha256};
use tracing::debug;

use syncdesk_core::error::{AppError, ErrorKind};
use syncdesk_core::result::AppResult;

use super::{Boundaries, FileChunk, checksum};

enum Source {
    Fixed { reader: BufReader<File>, size: u64 },
    ContentDefined(Box<StreamCDC<File>>),
}

impl Source {
    fn next_block(&mut self) -> AppResult<Option<Vec<u8>>> {
        match self {
            Self::Fixed { reader, size } => {
                let mut block = Vec::with_capacity(*size as usize);
                reader
                    .by_ref()
                    .take(*size)
                    .read_to_end(&mut block)
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Storage, "Failed to read chunk", e)
                    })?;
                Ok((!block.is_empty()).then_some(block))
            }
            Self::ContentDefined(cdc) => match cdc.next() {
                Some(Ok(chunk)) => Ok(Some(chunk.data)),
                Some(Err(e)) => Err(AppError::storage(format!("Failed to read chunk: {e}"))),
                None => Ok(None),
            },
        }
    }
}

/// Chunks of one file, read on demand.
///
/// One block of lookahead is kept so the last chunk can carry the
/// whole-file checksum. Call [`ChunkStream::close`] to release the file
/// before the stream is exhausted.
pub struct ChunkStream {
    source: Option<Source>,
    pending: Option<Vec<u8>>,
    hasher: Sha256,
    number: u64,
    file_checksum: Option<String>,
}

impl ChunkStream {
    pub(super) fn new(file: File, boundaries: Boundaries) -> Self {
        let source = match boundaries {
            Boundaries::Fixed { size } => Source::Fixed {
                reader: BufReader::new(file),
                size: u64::from(size.max(1)),
            },
            Boundaries::ContentDefined { min, avg, max } => {
                Source::ContentDefined(Box::new(StreamCDC::new(file, min, avg, max)))
            }
        };
        Self {
            source: Some(source),
            pending: None,
            hasher: Sha256::new(),
            number: 0,
            file_checksum: None,
        }
    }

    /// Whole-file checksum, available once the stream is exhausted.
    pub fn file_checksum(&self) -> Option<&str> {
        self.file_checksum.as_deref()
    }

    /// Number of chunks produced so far.
    pub fn produced(&self) -> u64 {
        self.number
    }

    /// Release the underlying file. Further calls to `next` yield `None`.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            debug!(produced = self.number, "Closed chunk stream");
        }
        self.pending = None;
    }

    fn read_block(&mut self) -> AppResult<Option<Vec<u8>>> {
        match self.source.as_mut() {
            Some(source) => source.next_block(),
            None => Ok(None),
        }
    }

    fn finish(&mut self) -> String {
        let digest = hex::encode(std::mem::take(&mut self.hasher).finalize());
        self.file_checksum = Some(digest.clone());
        self.source = None;
        digest
    }

    fn advance(&mut self) -> AppResult<Option<FileChunk>> {
        if self.source.is_none() {
            return Ok(None);
        }

        let current = match self.pending.take() {
            Some(block) => block,
            None => match self.read_block()? {
                Some(block) => block,
                None => {
                    self.finish();
                    return Ok(None);
                }
            },
        };
        let upcoming = self.read_block()?;

        self.hasher.update(&current);
        self.number += 1;

        let file_checksum = match upcoming {
            Some(block) => {
                self.pending = Some(block);
                None
            }
            None => Some(self.finish()),
        };

        Ok(Some(FileChunk {
            number: self.number,
            checksum: checksum(&current),
            contents: Bytes::from(current),
            file_checksum,
        }))
    }
}

impl Iterator for ChunkStream {
    type Item = AppResult<FileChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(chunk) => chunk.map(Ok),
            Err(e) => {
                self.close();
                Some(Err(e))
            }
        }
    }
}

impl fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkStream")
            .field("open", &self.source.is_some())
            .field("produced", &self.number)
            .field("file_checksum", &self.file_checksum)
            .finish()
    }
}
