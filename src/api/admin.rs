use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::fetcher::{Fetcher, RequestOptions};
use super::models::*;
use super::transport::{ApiRequest, Body, FilePart, Method};
use crate::error::{AppError, AppResult};
use crate::identity::Role;

pub const DEFAULT_USERS_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogSort {
    #[default]
    Recent,
    Popular,
}

impl BlogSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogSort::Recent => "recent",
            BlogSort::Popular => "popular",
        }
    }
}

impl fmt::Display for BlogSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for BlogSort {
    type Err = AppError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(BlogSort::Recent),
            "popular" => Ok(BlogSort::Popular),
            other => Err(AppError::Config(format!("unknown sort '{}'", other))),
        }
    }
}

/// `/users/list?q=..&role=..&page=..&limit=..`
pub fn users_list_path(q: &str, role: Role, page: u32, limit: u32) -> String {
    format!("/users/list?q={}&role={}&page={}&limit={}", urlencoding::encode(q), role, page, limit)
}

/// `/blogs?sort=..&q=..[&tags=a,b]&page=..`
pub fn blogs_path(sort: BlogSort, q: &str, tags: &[String], page: u32) -> String {
    let tag_query = if tags.is_empty() {
        String::new()
    } else {
        let joined = tags.iter().map(|t| urlencoding::encode(t).into_owned()).collect::<Vec<_>>().join(",");
        format!("&tags={}", joined)
    };
    format!("/blogs?sort={}&q={}{}&page={}", sort, urlencoding::encode(q.trim()), tag_query, page)
}

/// Typed wrappers over the fetcher for the backend's administrative endpoints.
#[derive(Clone)]
pub struct AdminApi {
    fetcher: Fetcher,
}

impl AdminApi {
    pub fn new(fetcher: Fetcher) -> Self { Self { fetcher } }

    pub fn fetcher(&self) -> &Fetcher { &self.fetcher }

    async fn fetch<T: DeserializeOwned>(&self, path: String, opts: RequestOptions) -> AppResult<T> {
        self.fetcher
            .request_as::<T>(&path, opts)
            .await?
            .ok_or_else(|| AppError::Internal(format!("no request issued for '{}'", path)))
    }

    pub async fn dashboard(&self) -> AppResult<DashboardData> {
        self.fetch("/dashboard/data".into(), RequestOptions::get()).await
    }

    pub async fn users(&self, q: &str, role: Role, page: u32, limit: u32) -> AppResult<UsersPage> {
        self.fetch(users_list_path(q, role, page, limit), RequestOptions::get()).await
    }

    pub async fn user_profile(&self, id: &str) -> AppResult<Profile> {
        self.fetch(format!("/users/profile/{}", urlencoding::encode(id)), RequestOptions::get()).await
    }

    /// Returns the updated profile when the backend echoes one back.
    pub async fn edit_profile(&self, edit: &ProfileEdit) -> AppResult<Option<UserProfile>> {
        let out: ProfileEdited = self.fetch("/users/profile/edit".into(), RequestOptions::post_json(edit)?).await?;
        Ok(out.new_user)
    }

    pub async fn blogs(&self, sort: BlogSort, q: &str, tags: &[String], page: u32) -> AppResult<BlogsPage> {
        self.fetch(blogs_path(sort, q, tags, page), RequestOptions::get()).await
    }

    pub async fn blog(&self, slug: &str) -> AppResult<Blog> {
        self.fetch(format!("/blogs/blog/{}", urlencoding::encode(slug)), RequestOptions::get()).await
    }

    pub async fn edit_blog(&self, slug: &str, edit: &BlogEdit) -> AppResult<Blog> {
        let out: BlogEdited = self
            .fetch(format!("/blogs/edit/{}", urlencoding::encode(slug)), RequestOptions::post_json(edit)?)
            .await?;
        Ok(out.blog)
    }

    pub async fn delete_blog(&self, slug: &str) -> AppResult<String> {
        let out: Acknowledged = self
            .fetch(format!("/blogs/delete/{}", urlencoding::encode(slug)), RequestOptions::delete())
            .await?;
        info!(target: "fetch", slug = %slug, "blog deleted");
        Ok(out.message)
    }

    /// Multipart upload to `{backend}/api/upload/image`. Any failure is logged and
    /// reported as `None` so the caller can show a soft notice.
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>, mime: Option<&str>) -> Option<UploadedImage> {
        let req = ApiRequest {
            method: Method::Post,
            url: self.fetcher.config().upload_url(),
            headers: Vec::new(),
            body: Some(Body::Multipart(FilePart {
                field: "image".into(),
                file_name: file_name.to_string(),
                bytes,
                mime: mime.map(|m| m.to_string()),
            })),
        };
        let resp = match self.fetcher.transport().send(req).await {
            Ok(r) => r,
            Err(e) => {
                warn!(target: "fetch", error = %e, "Error while uploading image");
                return None;
            }
        };
        if !resp.is_success() {
            warn!(target: "fetch", status = resp.status, "Error uploading image");
            return None;
        }
        match resp.json::<UploadedImage>() {
            Ok(img) => Some(img),
            Err(e) => {
                warn!(target: "fetch", error = %e, "upload response missing url/public_id");
                None
            }
        }
    }
}
