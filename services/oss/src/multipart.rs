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

use crate::body::Body;
use crate::constants::*;
use crate::model::*;
use crate::object::copy_source;
use crate::request::RequestDescription;
use crate::Client;
use bytes::Bytes;
use http::header::ETAG;
use http::{HeaderMap, Method};
use ossclient_core::time::{parse_rfc3339, DateTime};
use ossclient_core::{Error, Result};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// An in-progress multipart upload.
///
/// It holds no connection; any client can continue it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUpload {
    /// Bucket of the upload.
    pub bucket: String,
    /// Object key being assembled.
    pub key: String,
    /// Upload id assigned by the service.
    pub upload_id: String,
    /// When the upload was initiated, only known when listed.
    pub initiated: Option<DateTime>,
}

impl MultipartUpload {
    /// Re-attach to an upload by its id.
    pub fn new(bucket: &str, key: &str, upload_id: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            upload_id: upload_id.to_string(),
            initiated: None,
        }
    }

    fn request(&self, method: Method) -> RequestDescription {
        RequestDescription::new(method)
            .with_bucket(&self.bucket)
            .with_object(&self.key)
            .with_param("uploadId", self.upload_id.clone())
    }

    fn part_request(&self, method: Method, part_number: u32) -> RequestDescription {
        self.request(method)
            .with_param("partNumber", part_number.to_string())
    }
}

/// Options of [`Client::list_multipart_uploads`].
///
/// Marker fields are updated from each response so the next call continues
/// the listing.
#[derive(Debug, Clone, Default)]
pub struct ListMultipartUploadsOptions {
    pub prefix: String,
    pub delimiter: String,
    pub key_marker: String,
    pub upload_id_marker: String,
    pub next_key_marker: String,
    pub next_upload_id_marker: String,
    pub max_uploads: Option<usize>,
    pub encoding_type: String,
}

fn etag_of(headers: &HeaderMap) -> String {
    headers
        .get(ETAG)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).to_string())
        .unwrap_or_default()
}

impl Client {
    /// Initiate a multipart upload.
    pub async fn new_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        headers: HeaderMap,
    ) -> Result<MultipartUpload> {
        let req = RequestDescription::new(Method::POST)
            .with_bucket(bucket)
            .with_object(object)
            .with_headers(headers)
            .with_param("uploads", "");
        let result: InitiateMultipartUploadResult = self.send_xml(req).await?;

        Ok(MultipartUpload {
            bucket: result.bucket,
            key: result.key,
            upload_id: result.upload_id,
            initiated: None,
        })
    }

    /// Upload one part and return its ETag.
    pub async fn upload_part(
        &self,
        upload: &MultipartUpload,
        part_number: u32,
        body: impl Into<Body>,
    ) -> Result<String> {
        let req = upload.part_request(Method::PUT, part_number).with_body(body);
        let headers = self.send_discard(req).await?;
        Ok(etag_of(&headers))
    }

    /// Fill one part by copying from an existing object and return its ETag.
    ///
    /// `range` such as `bytes=0-1023` limits the copied bytes.
    pub async fn copy_part(
        &self,
        upload: &MultipartUpload,
        part_number: u32,
        source_bucket: &str,
        source_object: &str,
        range: Option<&str>,
        headers: HeaderMap,
    ) -> Result<String> {
        let mut req = upload
            .part_request(Method::PUT, part_number)
            .with_headers(headers)
            .with_header(X_OSS_COPY_SOURCE, &copy_source(source_bucket, source_object))?;
        if let Some(range) = range.filter(|r| !r.is_empty()) {
            req = req.with_header(X_OSS_COPY_SOURCE_RANGE, range)?;
        }

        let result: CopyPartResult = self.send_xml(req).await?;
        Ok(result.e_tag)
    }

    /// Assemble the uploaded parts, in the given order, into the object.
    pub async fn complete_upload(
        &self,
        upload: &MultipartUpload,
        parts: &[Part],
    ) -> Result<CompleteMultipartUploadResult> {
        let body = to_xml(&CompleteMultipartUpload {
            part: parts
                .iter()
                .map(|p| Part::new(p.part_number, p.e_tag.clone()))
                .collect(),
        })?;
        let req = upload.request(Method::POST).with_body(body);
        self.send_xml(req).await
    }

    /// Cancel the upload and drop all uploaded parts.
    pub async fn abort_upload(&self, upload: &MultipartUpload) -> Result<()> {
        self.send_discard(upload.request(Method::DELETE)).await?;
        Ok(())
    }

    /// List in-progress uploads of a bucket.
    pub async fn list_multipart_uploads(
        &self,
        bucket: &str,
        opts: &mut ListMultipartUploadsOptions,
    ) -> Result<Vec<MultipartUpload>> {
        let mut req = RequestDescription::new(Method::GET)
            .with_bucket(bucket)
            .with_param("uploads", "")
            .with_param_non_empty("prefix", &opts.prefix)
            .with_param_non_empty("delimiter", &opts.delimiter)
            .with_param_non_empty("key-marker", &opts.key_marker)
            .with_param_non_empty("upload-id-marker", &opts.upload_id_marker)
            .with_param_non_empty("encoding-type", &opts.encoding_type);
        if let Some(max_uploads) = opts.max_uploads {
            req = req.with_param("max-uploads", max_uploads.to_string());
        }

        let result: ListMultipartUploadsResult = self.send_xml(req).await?;

        opts.key_marker = result.key_marker;
        opts.upload_id_marker = result.upload_id_marker;
        opts.next_key_marker = result.next_key_marker;
        opts.next_upload_id_marker = result.next_upload_id_marker;
        opts.delimiter = result.delimiter;
        opts.prefix = result.prefix;
        if let Ok(v) = result.max_uploads.parse() {
            opts.max_uploads = Some(v);
        }

        Ok(result
            .upload
            .into_iter()
            .map(|u| MultipartUpload {
                bucket: result.bucket.clone(),
                key: u.key,
                upload_id: u.upload_id,
                initiated: parse_rfc3339(&u.initiated).ok(),
            })
            .collect())
    }

    /// List uploaded parts of an upload.
    pub async fn list_parts(
        &self,
        upload: &MultipartUpload,
        max_parts: Option<u32>,
        part_number_marker: Option<u32>,
    ) -> Result<ListPartsResult> {
        let mut req = upload.request(Method::GET);
        if let Some(v) = max_parts {
            req = req.with_param("max-parts", v.to_string());
        }
        if let Some(v) = part_number_marker {
            req = req.with_param("part-number-marker", v.to_string());
        }

        self.send_xml(req).await
    }

    /// Upload a local file as `part_size` sized parts, one after another.
    ///
    /// `part_size` must be at least 100 KiB and smaller than the file. If any part
    /// fails the upload is aborted.
    pub async fn upload_large_file(
        &self,
        bucket: &str,
        object: &str,
        path: impl AsRef<Path>,
        part_size: u64,
        headers: HeaderMap,
    ) -> Result<CompleteMultipartUploadResult> {
        let path = path.as_ref();
        if part_size < MIN_PART_SIZE {
            return Err(Error::request_invalid(format!(
                "part size must be at least {MIN_PART_SIZE} bytes, got {part_size}"
            )));
        }

        let mut file = tokio::fs::File::open(path).await.map_err(|e| {
            Error::unexpected(format!("failed to open {}", path.display())).with_source(e)
        })?;
        let file_size = file.metadata().await?.len();
        if file_size <= part_size {
            return Err(Error::request_invalid(format!(
                "file size {file_size} must be larger than the part size {part_size}"
            )));
        }
        let total = file_size.div_ceil(part_size);
        log::debug!("upload {} as {total} parts into {bucket}/{object}", path.display());

        let upload = self.new_multipart_upload(bucket, object, headers).await?;

        let mut parts = Vec::with_capacity(total as usize);
        for part_number in 1..=total as u32 {
            let mut buf = Vec::new();
            let res = match (&mut file).take(part_size).read_to_end(&mut buf).await {
                Ok(_) => {
                    self.upload_part(&upload, part_number, Bytes::from(buf))
                        .await
                }
                Err(err) => Err(err.into()),
            };

            match res {
                Ok(etag) => {
                    log::debug!("uploaded part {part_number}/{total}, etag {etag}");
                    parts.push(Part::new(part_number, etag));
                }
                Err(err) => {
                    if let Err(abort_err) = self.abort_upload(&upload).await {
                        log::warn!(
                            "failed to abort upload {} after part failure: {abort_err}",
                            upload.upload_id
                        );
                    }
                    return Err(Error::unexpected(format!(
                        "multipart upload of {bucket}/{object} failed at part {part_number}"
                    ))
                    .with_source(err));
                }
            }
        }

        self.complete_upload(&upload, &parts).await
    }
}
