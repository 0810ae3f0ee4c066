// --- Response envelopes (XML) ---

use chrono::{DateTime, Utc};
use quick_xml::se::to_string;
use serde::Serialize;

use crate::backend::BucketInfo;
use crate::fault::XML_DECLARATION;

pub const S3_XMLNS: &str = "http://s3.amazonaws.com/doc/2006-03-01/";
pub const OWNER_ID: &str = "local-minio";
pub const OWNER_DISPLAY_NAME: &str = "local-user";

// For listing buckets
#[derive(Serialize)]
#[serde(rename = "ListAllMyBucketsResult")]
pub struct ListBucketsResponse {
    #[serde(rename = "@xmlns")]
    pub xmlns: &'static str,
    #[serde(rename = "Buckets")]
    pub buckets: Buckets,
    #[serde(rename = "Owner")]
    pub owner: Owner,
}

#[derive(Serialize)]
pub struct Buckets {
    #[serde(rename = "Bucket")]
    pub bucket: Vec<Bucket>,
}

#[derive(Serialize)]
pub struct Bucket {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CreationDate", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
}

#[derive(Serialize)]
pub struct Owner {
    #[serde(rename = "ID")]
    pub id: &'static str,
    #[serde(rename = "DisplayName")]
    pub display_name: &'static str,
}

impl ListBucketsResponse {
    pub fn from_buckets(buckets: Vec<BucketInfo>) -> Self {
        let bucket = buckets
            .into_iter()
            .map(|info| Bucket {
                name: info.name,
                creation_date: info.creation_date.map(|created| {
                    DateTime::<Utc>::from(created)
                        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                        .to_string()
                }),
            })
            .collect();

        Self {
            xmlns: S3_XMLNS,
            buckets: Buckets { bucket },
            owner: Owner {
                id: OWNER_ID,
                display_name: OWNER_DISPLAY_NAME,
            },
        }
    }

    pub fn to_xml(&self) -> Result<String, Box<dyn std::error::Error>> {
        let mut xml = String::from(XML_DECLARATION);
        xml.push_str(&to_string(self).map_err(|e| Box::new(e) as Box<dyn std::error::Error>)?);
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_list_buckets_xml() {
        let created = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let xml = ListBucketsResponse::from_buckets(vec![
            BucketInfo {
                name: "alpha".to_string(),
                creation_date: Some(created),
            },
            BucketInfo {
                name: "beta".to_string(),
                creation_date: None,
            },
        ])
        .to_xml()
        .unwrap();

        assert!(xml.contains(
            "<ListAllMyBucketsResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">"
        ));
        assert!(xml.contains(
            "<Bucket><Name>alpha</Name><CreationDate>2023-11-14T22:13:20.000Z</CreationDate></Bucket>"
        ));
        assert!(xml.contains("<Bucket><Name>beta</Name></Bucket>"));
        assert!(xml.contains("<Owner><ID>local-minio</ID><DisplayName>local-user</DisplayName></Owner>"));
    }
}
