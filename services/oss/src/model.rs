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

//! XML documents exchanged with the service.
//!
//! Unknown elements are ignored and missing ones keep their default value.

use bytes::{Buf, Bytes};
use ossclient_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Decode a success response body.
pub fn from_xml<T: DeserializeOwned>(body: Bytes) -> Result<T> {
    let bs = body.trim_ascii_start();
    quick_xml::de::from_reader(bs.reader())
        .map_err(|e| Error::serialization("failed to parse xml response").with_source(e))
}

/// Encode a request body.
pub fn to_xml<T: Serialize>(value: &T) -> Result<String> {
    quick_xml::se::to_string(value)
        .map_err(|e| Error::serialization("failed to serialize xml request").with_source(e))
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

/// Canned ACL of a bucket or an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Acl {
    /// Only the owner has access.
    Private,
    /// Anyone can read.
    PublicRead,
    /// Anyone can read and write.
    PublicReadWrite,
}

impl Acl {
    /// The value sent in `x-oss-acl` and `x-oss-object-acl`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
            Acl::PublicReadWrite => "public-read-write",
        }
    }
}

impl Display for Acl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Acl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "private" => Ok(Acl::Private),
            "public-read" => Ok(Acl::PublicRead),
            "public-read-write" => Ok(Acl::PublicReadWrite),
            v => Err(Error::request_invalid(format!("unknown acl {v:?}"))),
        }
    }
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Owner {
    #[serde(rename = "ID")]
    pub id: String,
    pub display_name: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct BucketInfo {
    pub name: String,
    pub location: String,
    pub creation_date: String,
    pub extranet_endpoint: String,
    pub intranet_endpoint: String,
    pub storage_class: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Buckets {
    #[serde(rename = "Bucket")]
    pub bucket: Vec<BucketInfo>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ListAllMyBucketsResult {
    pub prefix: String,
    pub marker: String,
    pub max_keys: String,
    pub is_truncated: bool,
    pub next_marker: String,
    pub owner: Owner,
    pub buckets: Buckets,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: String,
    pub e_tag: String,
    #[serde(rename = "Type")]
    pub object_type: String,
    pub size: u64,
    pub storage_class: String,
    pub owner: Owner,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CommonPrefix {
    pub prefix: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ListBucketResult {
    pub name: String,
    pub prefix: String,
    pub marker: String,
    pub next_marker: String,
    pub max_keys: String,
    pub delimiter: String,
    pub encoding_type: String,
    pub is_truncated: bool,
    pub contents: Vec<ObjectSummary>,
    pub common_prefixes: Vec<CommonPrefix>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccessControlList {
    #[serde(rename = "Grant")]
    pub grant: Vec<String>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AccessControlPolicy {
    pub owner: Owner,
    pub access_control_list: AccessControlList,
}

/// Region of a bucket: `<LocationConstraint>oss-cn-hangzhou</LocationConstraint>`.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocationConstraint {
    #[serde(rename = "$text")]
    pub location: String,
}

#[derive(Default, Debug, Clone, Serialize)]
#[serde(rename = "CreateBucketConfiguration", rename_all = "PascalCase")]
pub struct CreateBucketConfiguration {
    pub location_constraint: String,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LoggingEnabled {
    pub target_bucket: String,
    pub target_prefix: String,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "BucketLoggingStatus", rename_all = "PascalCase")]
pub struct BucketLoggingStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging_enabled: Option<LoggingEnabled>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct IndexDocument {
    pub suffix: String,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ErrorDocument {
    pub key: String,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "WebsiteConfiguration", rename_all = "PascalCase")]
pub struct WebsiteConfiguration {
    pub index_document: IndexDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_document: Option<ErrorDocument>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefererList {
    #[serde(rename = "Referer")]
    pub referer: Vec<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "RefererConfiguration", rename_all = "PascalCase")]
pub struct RefererConfiguration {
    pub allow_empty_referer: bool,
    pub referer_list: RefererList,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Expiration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LifecycleRule {
    #[serde(rename = "ID")]
    pub id: String,
    pub prefix: String,
    /// `Enabled` or `Disabled`.
    pub status: String,
    pub expiration: Expiration,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "LifecycleConfiguration")]
pub struct LifecycleConfiguration {
    #[serde(rename = "Rule")]
    pub rule: Vec<LifecycleRule>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CorsRule {
    pub allowed_origin: Vec<String>,
    pub allowed_method: Vec<String>,
    pub allowed_header: Vec<String>,
    pub expose_header: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age_seconds: Option<u32>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "CORSConfiguration")]
pub struct CorsConfiguration {
    #[serde(rename = "CORSRule")]
    pub cors_rule: Vec<CorsRule>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CopyObjectResult {
    pub last_modified: String,
    pub e_tag: String,
}

#[derive(Default, Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectIdentifier {
    pub key: String,
}

/// Body of a multi-object delete.
#[derive(Default, Debug, Clone, Serialize)]
#[serde(rename = "Delete", rename_all = "PascalCase")]
pub struct Delete {
    pub quiet: bool,
    pub object: Vec<ObjectIdentifier>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DeletedObject {
    pub key: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DeleteResult {
    pub deleted: Vec<DeletedObject>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct InitiateMultipartUploadResult {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CopyPartResult {
    pub last_modified: String,
    pub e_tag: String,
}

/// A part of a multipart upload.
///
/// Only `part_number` and `e_tag` are needed to complete an upload.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Part {
    pub part_number: u32,
    pub e_tag: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_modified: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub size: u64,
}

impl Part {
    /// Create a part reference used by `complete_upload`.
    pub fn new(part_number: u32, e_tag: impl Into<String>) -> Self {
        Self {
            part_number,
            e_tag: e_tag.into(),
            ..Default::default()
        }
    }
}

#[derive(Default, Debug, Clone, Serialize)]
#[serde(rename = "CompleteMultipartUpload")]
pub struct CompleteMultipartUpload {
    #[serde(rename = "Part")]
    pub part: Vec<Part>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CompleteMultipartUploadResult {
    pub location: String,
    pub bucket: String,
    pub key: String,
    pub e_tag: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Upload {
    pub key: String,
    pub upload_id: String,
    pub initiated: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ListMultipartUploadsResult {
    pub bucket: String,
    pub key_marker: String,
    pub upload_id_marker: String,
    pub next_key_marker: String,
    pub next_upload_id_marker: String,
    pub delimiter: String,
    pub prefix: String,
    pub max_uploads: String,
    pub is_truncated: bool,
    pub upload: Vec<Upload>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ListPartsResult {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub part_number_marker: u32,
    pub next_part_number_marker: u32,
    pub max_parts: u32,
    pub is_truncated: bool,
    pub part: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_access_control_policy() -> anyhow::Result<()> {
        let bs = Bytes::from_static(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<AccessControlPolicy>
  <Owner>
    <ID>00220120222</ID>
    <DisplayName>user_example</DisplayName>
  </Owner>
  <AccessControlList>
    <Grant>public-read</Grant>
  </AccessControlList>
</AccessControlPolicy>"#,
        );

        let policy: AccessControlPolicy = from_xml(bs)?;
        assert_eq!(policy.owner.id, "00220120222");
        assert_eq!(policy.owner.display_name, "user_example");
        assert_eq!(policy.access_control_list.grant, vec!["public-read"]);
        Ok(())
    }

    #[test]
    fn test_parse_list_bucket_result() -> anyhow::Result<()> {
        let bs = Bytes::from_static(
            br#"
<ListBucketResult xmlns="http://doc.oss-cn-hangzhou.aliyuncs.com">
  <Name>examplebucket</Name>
  <Prefix>fun/</Prefix>
  <Marker></Marker>
  <MaxKeys>100</MaxKeys>
  <Delimiter>/</Delimiter>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>fun/movie/001.avi</Key>
    <LastModified>2012-02-24T08:43:07.000Z</LastModified>
    <ETag>"5B3C1A2E053D763E1B002CC607C5A0FE"</ETag>
    <Type>Normal</Type>
    <Size>344606</Size>
    <StorageClass>Standard</StorageClass>
    <Owner>
      <ID>0022012****</ID>
      <DisplayName>user-example</DisplayName>
    </Owner>
  </Contents>
  <Contents>
    <Key>fun/movie/007.avi</Key>
    <Size>344607</Size>
  </Contents>
  <CommonPrefixes>
    <Prefix>fun/test/</Prefix>
  </CommonPrefixes>
</ListBucketResult>"#,
        );

        let result: ListBucketResult = from_xml(bs)?;
        assert_eq!(result.name, "examplebucket");
        assert_eq!(result.max_keys, "100");
        assert!(!result.is_truncated);
        assert_eq!(result.contents.len(), 2);
        assert_eq!(result.contents[0].e_tag, "\"5B3C1A2E053D763E1B002CC607C5A0FE\"");
        assert_eq!(result.contents[0].object_type, "Normal");
        assert_eq!(result.contents[1].size, 344607);
        assert_eq!(result.common_prefixes[0].prefix, "fun/test/");
        Ok(())
    }

    #[test]
    fn test_parse_location_constraint() -> anyhow::Result<()> {
        let bs = Bytes::from_static(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<LocationConstraint xmlns="http://doc.oss-cn-hangzhou.aliyuncs.com">oss-cn-hangzhou</LocationConstraint>"#,
        );
        let location: LocationConstraint = from_xml(bs)?;
        assert_eq!(location.location, "oss-cn-hangzhou");
        Ok(())
    }

    #[test]
    fn test_parse_list_parts_result() -> anyhow::Result<()> {
        let bs = Bytes::from_static(
            br#"<ListPartsResult>
  <Bucket>multipart_upload</Bucket>
  <Key>multipart.data</Key>
  <UploadId>0004B999EF5A239BB9138C6227D69F95</UploadId>
  <NextPartNumberMarker>5</NextPartNumberMarker>
  <MaxParts>1000</MaxParts>
  <IsTruncated>false</IsTruncated>
  <Part>
    <PartNumber>1</PartNumber>
    <LastModified>2012-02-23T07:01:34.000Z</LastModified>
    <ETag>"3349DC700140D7F86A0784842780****"</ETag>
    <Size>6291456</Size>
  </Part>
</ListPartsResult>"#,
        );
        let result: ListPartsResult = from_xml(bs)?;
        assert_eq!(result.upload_id, "0004B999EF5A239BB9138C6227D69F95");
        assert_eq!(result.next_part_number_marker, 5);
        assert_eq!(result.part[0].part_number, 1);
        assert_eq!(result.part[0].size, 6291456);
        Ok(())
    }

    #[test]
    fn test_parse_malformed_is_serialization_error() {
        let err = from_xml::<ListPartsResult>(Bytes::from_static(
            b"<ListPartsResult><MaxParts>many</MaxParts></ListPartsResult>",
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ossclient_core::ErrorKind::Serialization);
    }

    #[test]
    fn test_serialize_complete_multipart_upload() -> anyhow::Result<()> {
        let body = to_xml(&CompleteMultipartUpload {
            part: vec![Part::new(1, "etag1"), Part::new(2, "etag2")],
        })?;
        assert_eq!(
            body,
            "<CompleteMultipartUpload><Part><PartNumber>1</PartNumber><ETag>etag1</ETag></Part><Part><PartNumber>2</PartNumber><ETag>etag2</ETag></Part></CompleteMultipartUpload>"
        );
        Ok(())
    }

    #[test]
    fn test_serialize_delete() -> anyhow::Result<()> {
        let body = to_xml(&Delete {
            quiet: true,
            object: vec![
                ObjectIdentifier { key: "a".to_string() },
                ObjectIdentifier { key: "b/c".to_string() },
            ],
        })?;
        assert_eq!(
            body,
            "<Delete><Quiet>true</Quiet><Object><Key>a</Key></Object><Object><Key>b/c</Key></Object></Delete>"
        );
        Ok(())
    }

    #[test]
    fn test_serialize_bucket_logging_status() -> anyhow::Result<()> {
        let body = to_xml(&BucketLoggingStatus {
            logging_enabled: Some(LoggingEnabled {
                target_bucket: "logs".to_string(),
                target_prefix: "access-".to_string(),
            }),
        })?;
        assert_eq!(
            body,
            "<BucketLoggingStatus><LoggingEnabled><TargetBucket>logs</TargetBucket><TargetPrefix>access-</TargetPrefix></LoggingEnabled></BucketLoggingStatus>"
        );
        Ok(())
    }

    #[test]
    fn test_acl() {
        assert_eq!(Acl::PublicRead.to_string(), "public-read");
        assert_eq!("public-read-write".parse::<Acl>().unwrap(), Acl::PublicReadWrite);
        assert!("public".parse::<Acl>().is_err());
    }
}
