//! 托管对象存储客户端
//!
//! 收据文件和相册图片都保存在托管存储桶中，本模块只负责调用其 REST 接口。

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::config::BackendConfig;
use crate::error::{GymError, Result};

/// 存储桶中的对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub name: String,
    pub size: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 对象存储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 上传对象，同名对象已存在时失败
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    /// 批量删除对象
    async fn remove(&self, bucket: &str, paths: Vec<String>) -> Result<()>;

    /// 生成带有效期的签名下载链接
    async fn signed_url(&self, bucket: &str, path: &str, expires_in_secs: u64) -> Result<String>;

    /// 列出前缀下的对象
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<StoredObject>>;

    /// 公开桶的直链，不发起请求
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// 列表接口返回的原始对象
#[derive(Debug, Deserialize)]
struct RawObject {
    name: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    metadata: Option<Value>,
}

impl RawObject {
    /// id 为空的条目是"文件夹"占位，不是实际对象
    fn into_object(self) -> Option<StoredObject> {
        self.id.as_ref()?;
        let size = self
            .metadata
            .as_ref()
            .and_then(|m| m.get("size"))
            .and_then(Value::as_i64);

        Some(StoredObject {
            name: self.name,
            size,
            updated_at: self.updated_at,
        })
    }
}

/// 托管存储 REST 客户端（使用 service-role key）
#[derive(Clone)]
pub struct HostedStorageClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl HostedStorageClient {
    pub fn new(config: &BackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_role_key.clone(),
        }
    }

    fn object_url(&self, segment: &str, bucket: &str, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if segment.is_empty() {
            format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
        } else {
            format!(
                "{}/storage/v1/object/{}/{}/{}",
                self.base_url, segment, bucket, path
            )
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(body);
        }

        let message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        warn!(status = status.as_u16(), message = %message, "对象存储返回错误");

        Err(GymError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ObjectStorage for HostedStorageClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let request = self
            .client
            .post(self.object_url("", bucket, path))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);

        self.send(request).await?;
        debug!(bucket, path, "对象上传成功");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, bucket: &str, paths: Vec<String>) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let request = self
            .client
            .delete(format!("{}/storage/v1/object/{}", self.base_url, bucket))
            .json(&json!({ "prefixes": paths }));

        self.send(request).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn signed_url(&self, bucket: &str, path: &str, expires_in_secs: u64) -> Result<String> {
        let request = self
            .client
            .post(self.object_url("sign", bucket, path))
            .json(&json!({ "expiresIn": expires_in_secs }));

        let body = self.send(request).await?;
        let signed = body
            .get("signedURL")
            .or_else(|| body.get("signedUrl"))
            .and_then(Value::as_str)
            .ok_or_else(|| GymError::Internal("签名链接响应缺少 signedURL".to_string()))?;

        Ok(format!("{}/storage/v1{}", self.base_url, signed))
    }

    #[instrument(skip(self))]
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<StoredObject>> {
        let request = self
            .client
            .post(format!("{}/storage/v1/object/list/{}", self.base_url, bucket))
            .json(&json!({
                "prefix": prefix,
                "limit": 1000,
                "offset": 0,
                "sortBy": { "column": "name", "order": "asc" },
            }));

        let body = self.send(request).await?;
        let raw: Vec<RawObject> = serde_json::from_value(body)
            .map_err(|e| GymError::Internal(format!("对象列表解析失败: {}", e)))?;

        Ok(raw.into_iter().filter_map(RawObject::into_object).collect())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.object_url("public", bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HostedStorageClient {
        HostedStorageClient::new(&BackendConfig {
            url: "https://project.example.co/".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            client().public_url("gallery", "/floor/1.jpg"),
            "https://project.example.co/storage/v1/object/public/gallery/floor/1.jpg"
        );
    }

    #[test]
    fn test_object_url_without_segment() {
        assert_eq!(
            client().object_url("", "receipts", "u1/a.pdf"),
            "https://project.example.co/storage/v1/object/receipts/u1/a.pdf"
        );
    }

    #[test]
    fn test_raw_object_skips_folders() {
        let raw: Vec<RawObject> = serde_json::from_value(json!([
            {"name": "folder", "id": null, "metadata": null},
            {
                "name": "pool.jpg",
                "id": "e3b0c442",
                "updated_at": "2024-05-01T10:00:00Z",
                "metadata": {"size": 2048, "mimetype": "image/jpeg"}
            }
        ]))
        .unwrap();

        let objects: Vec<StoredObject> = raw.into_iter().filter_map(RawObject::into_object).collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "pool.jpg");
        assert_eq!(objects[0].size, Some(2048));
        assert!(objects[0].updated_at.is_some());
    }

    #[tokio::test]
    async fn test_mock_storage_remove() {
        let mut mock = MockObjectStorage::new();
        mock.expect_remove()
            .withf(|bucket, paths| bucket == "receipts" && paths.len() == 1)
            .times(1)
            .returning(|_, _| Ok(()));

        mock.remove("receipts", vec!["u1/a.pdf".to_string()])
            .await
            .unwrap();
    }
}
