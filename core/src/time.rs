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

//! Time related utils.

use crate::Error;
use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse http date like `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn parse_http_date(s: &str) -> crate::Result<DateTime> {
    let t = chrono::NaiveDateTime::parse_from_str(s, "%a, %d %b %Y %H:%M:%S GMT")
        .map_err(|e| Error::unexpected(format!("invalid http date: {s}")).with_source(e))?;
    Ok(t.and_utc())
}

/// Parse a RFC3339 timestamp like `2014-05-15T11:18:32.000Z`.
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::unexpected(format!("invalid rfc3339 time: {s}")).with_source(e))?;
    Ok(t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_time() -> DateTime {
        Utc.with_ymd_and_hms(2022, 3, 1, 8, 12, 34).unwrap()
    }

    #[test]
    fn test_format_http_date() {
        let t = test_time();
        assert_eq!("Tue, 01 Mar 2022 08:12:34 GMT", format_http_date(t));
    }

    #[test]
    fn test_parse_http_date() {
        let t = parse_http_date("Wed, 21 Oct 2015 07:17:58 GMT").unwrap();
        assert_eq!(format_http_date(t), "Wed, 21 Oct 2015 07:17:58 GMT");
    }

    #[test]
    fn test_parse_rfc3339() {
        let t = parse_rfc3339("2022-03-01T08:12:34.000Z").unwrap();
        assert_eq!(t, test_time());
    }
}
