use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::Config;

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to reach object store: {0}")]
    Request(String),
    #[error("Object store error: {0}")]
    Service(String),
}

/// Object-store collaborator. Uploads are public-read overwrites; URLs are
/// derived from an explicitly configured public base URL rather than inferred
/// from bucket and endpoint strings.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: Option<String>,
    ) -> Result<(), StorageError>;

    fn public_url(&self, key: &str) -> String;
}

/// DigitalOcean Spaces (S3-compatible) client signing requests with SigV4.
pub struct SpacesClient {
    key: String,
    secret: String,
    region: String,
    bucket: String,
    public_base_url: String,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn derive_signing_key(secret: &str, datestamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), datestamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

impl SpacesClient {
    pub fn new(config: &Config) -> Self {
        Self {
            key: config.spaces_key.clone(),
            secret: config.spaces_secret.clone(),
            region: config.spaces_region.clone(),
            bucket: config.spaces_bucket.clone(),
            public_base_url: config.spaces_public_base_url.clone(),
        }
    }

    fn host(&self) -> String {
        format!("{}.digitaloceanspaces.com", self.region)
    }

    fn authorization_header(
        &self,
        now: DateTime<Utc>,
        canonical_uri: &str,
        payload_hash: &str,
        acl: &str,
    ) -> (String, String) {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = now.format("%Y%m%d").to_string();

        let canonical_headers = format!(
            "host:{}\nx-amz-acl:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            self.host(),
            acl,
            payload_hash,
            amz_date
        );
        let signed_headers = "host;x-amz-acl;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "PUT\n{}\n\n{}\n{}\n{}",
            canonical_uri, canonical_headers, signed_headers, payload_hash
        );

        let scope = format!("{}/{}/s3/aws4_request", datestamp, self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let signing_key = derive_signing_key(&self.secret, &datestamp, &self.region, "s3");
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.key, scope, signed_headers, signature
        );
        (authorization, amz_date)
    }
}

#[async_trait::async_trait]
impl ObjectStore for SpacesClient {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: Option<String>,
    ) -> Result<(), StorageError> {
        let canonical_uri = format!("/{}/{}", self.bucket, key);
        let payload_hash = sha256_hex(&body);
        let acl = "public-read";
        let (authorization, amz_date) =
            self.authorization_header(Utc::now(), &canonical_uri, &payload_hash, acl);

        let url = format!("https://{}{}", self.host(), canonical_uri);
        let client = reqwest::Client::new();
        let mut request = client
            .put(&url)
            .header("Authorization", authorization)
            .header("x-amz-date", amz_date)
            .header("x-amz-content-sha256", payload_hash)
            .header("x-amz-acl", acl)
            .header("Content-Type", content_type);
        if let Some(cache_control) = cache_control {
            request = request.header("Cache-Control", cache_control);
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StorageError::Service(error_text));
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Signing-key derivation vector from the AWS SigV4 documentation.
    #[test]
    fn signing_key_matches_aws_test_vector() {
        let key = derive_signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20150830",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn public_url_joins_base_and_key() {
        let client = SpacesClient {
            key: "k".into(),
            secret: "s".into(),
            region: "ams3".into(),
            bucket: "chimes".into(),
            public_base_url: "https://chimes.ams3.digitaloceanspaces.com".into(),
        };
        assert_eq!(
            client.public_url("7_status.json"),
            "https://chimes.ams3.digitaloceanspaces.com/7_status.json"
        );
    }
}
