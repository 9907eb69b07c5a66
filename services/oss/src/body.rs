// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::Bytes;
use ossclient_core::hash::{base64_md5, ContentMd5};
use ossclient_core::{Error, Result};
use std::fmt::{Debug, Formatter};
use std::io::SeekFrom;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// A reader that can be rewound.
pub trait SeekableRead: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T> SeekableRead for T where T: AsyncRead + AsyncSeek + Send + Unpin {}

/// Request payload.
///
/// Content-MD5 must be known before the request is signed, so every body is
/// materialised once and the same bytes are resent on each attempt.
#[derive(Default)]
pub enum Body {
    /// No payload.
    #[default]
    Empty,
    /// In-memory bytes.
    Bytes(Bytes),
    /// A re-readable source: hashed while streamed, rewound, then read.
    Seekable(Box<dyn SeekableRead>),
    /// A one-shot source of exactly `length` bytes, buffered then hashed.
    Stream {
        /// The reader.
        reader: Box<dyn AsyncRead + Send + Unpin>,
        /// Number of bytes the reader must yield.
        length: u64,
    },
}

impl Debug for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Bytes(bs) => write!(f, "Body::Bytes({} bytes)", bs.len()),
            Body::Seekable(_) => f.write_str("Body::Seekable"),
            Body::Stream { length, .. } => write!(f, "Body::Stream({length} bytes)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bs: Bytes) -> Self {
        Body::Bytes(bs)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bs: Vec<u8>) -> Self {
        Body::Bytes(bs.into())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(s.into())
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl Body {
    /// Build a body from a seekable reader such as a [`tokio::fs::File`].
    pub fn seekable(reader: impl SeekableRead + 'static) -> Self {
        Body::Seekable(Box::new(reader))
    }

    /// Build a body from a one-shot reader that yields exactly `length` bytes.
    pub fn stream(reader: impl AsyncRead + Send + Unpin + 'static, length: u64) -> Self {
        Body::Stream {
            reader: Box::new(reader),
            length,
        }
    }

    /// Materialise the body and compute its Content-MD5.
    ///
    /// Returns `None` as the digest for an empty body.
    pub async fn prepare(self) -> Result<(Bytes, Option<String>)> {
        match self {
            Body::Empty => Ok((Bytes::new(), None)),
            Body::Bytes(bs) => {
                let md5 = base64_md5(&bs);
                Ok((bs, Some(md5)))
            }
            Body::Seekable(mut r) => {
                let md5 = md5_of_seekable(&mut r).await?;
                let mut buf = Vec::new();
                r.read_to_end(&mut buf).await?;
                Ok((buf.into(), Some(md5)))
            }
            Body::Stream { reader, length } => {
                let mut buf = Vec::new();
                let read = reader.take(length).read_to_end(&mut buf).await?;
                if (read as u64) != length {
                    return Err(Error::request_invalid(format!(
                        "stream body is shorter than declared: expected {length} bytes, got {read}"
                    )));
                }
                let md5 = base64_md5(&buf);
                Ok((buf.into(), Some(md5)))
            }
        }
    }
}

/// Compute the Content-MD5 of a seekable reader from its start.
///
/// The reader is rewound to its start afterwards, so the caller can read the
/// same bytes again.
pub async fn md5_of_seekable<R: SeekableRead + ?Sized>(r: &mut R) -> Result<String> {
    r.seek(SeekFrom::Start(0)).await?;

    let mut hasher = ContentMd5::new();
    let mut buf = vec![0; 64 * 1024];
    loop {
        let n = r.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    r.seek(SeekFrom::Start(0)).await?;
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossclient_core::ErrorKind;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_seekable_md5_is_stable_across_reads() -> anyhow::Result<()> {
        let content = b"the same bytes every time".repeat(5000);
        let mut cursor = Cursor::new(content.clone());

        let first = md5_of_seekable(&mut cursor).await?;
        let second = md5_of_seekable(&mut cursor).await?;
        assert_eq!(first, second);
        assert_eq!(first, base64_md5(&content));

        let (bs, md5) = Body::seekable(Cursor::new(content.clone())).prepare().await?;
        assert_eq!(bs.as_ref(), content.as_slice());
        assert_eq!(md5.as_deref(), Some(first.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn test_seekable_starts_from_beginning() -> anyhow::Result<()> {
        let mut cursor = Cursor::new(b"hello world".to_vec());
        cursor.set_position(6);

        let (bs, md5) = Body::seekable(cursor).prepare().await?;
        assert_eq!(bs.as_ref(), b"hello world");
        assert_eq!(md5, Some(base64_md5(b"hello world")));
        Ok(())
    }

    #[tokio::test]
    async fn test_stream_body() -> anyhow::Result<()> {
        let (bs, md5) = Body::stream(&b"hello world, and more"[..], 11)
            .prepare()
            .await?;
        assert_eq!(bs.as_ref(), b"hello world");
        assert_eq!(md5, Some(base64_md5(b"hello world")));

        let err = Body::stream(&b"short"[..], 11).prepare().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_body() -> anyhow::Result<()> {
        let (bs, md5) = Body::Empty.prepare().await?;
        assert!(bs.is_empty());
        assert!(md5.is_none());

        let (_, md5) = Body::from("").prepare().await?;
        assert_eq!(md5.as_deref(), Some("1B2M2Y8AsgTpgAmY7PhCfw=="));
        Ok(())
    }
}
