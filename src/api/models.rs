//! Backend payload shapes. Field names follow the backend's JSON; missing fields
//! fall back to defaults so older backends still decode.

use serde::{Deserialize, Serialize};

use crate::identity::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    #[default]
    Allowed,
    Banned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityCounts {
    #[serde(rename = "blogThread")]
    pub blog_thread: u64,
    #[serde(rename = "blogThreadLike")]
    pub blog_thread_like: u64,
    pub likes: u64,
    pub threads: u64,
    #[serde(rename = "blogLikes")]
    pub blog_likes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub username: String,
    pub email: String,
    pub private: bool,
    pub status: UserStatus,
    pub bio: Option<String>,
    pub role: Option<Role>,
    pub image: Option<String>,
    #[serde(rename = "profileImage")]
    pub profile_image: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "_count")]
    pub counts: ActivityCounts,
}

impl UserProfile {
    /// Avatar to show: uploaded image first, provider profile image second.
    pub fn avatar(&self) -> Option<&str> {
        self.image.as_deref().filter(|s| !s.is_empty()).or(self.profile_image.as_deref())
    }

    /// `YYYY-MM-DD` part of the join timestamp.
    pub fn joined_on(&self) -> &str {
        self.created_at.split('T').next().unwrap_or("")
    }
}

/// Row of the blog list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogItem {
    pub id: String,
    pub url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub slug: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<String>,
    pub username: String,
    pub image: Option<String>,
    pub user_id: String,
    pub views: u64,
    pub likes_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogAuthor {
    pub id: String,
    pub username: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogCounts {
    pub likes: u64,
    pub thread: u64,
}

/// Full blog as returned by the detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub content: String,
    pub html: String,
    pub tags: Vec<String>,
    pub slug: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<String>,
    pub author: BlogAuthor,
    pub views: u64,
    #[serde(rename = "_count")]
    pub counts: BlogCounts,
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// User detail page payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub user_profile: UserProfile,
    pub blogs: Listing<BlogItem>,
    pub likes: Option<Listing<serde_json::Value>>,
    pub comments: Option<Listing<serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counter {
    pub count: u64,
    #[serde(rename = "last7Days")]
    pub last_7_days: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadAuthor {
    pub id: String,
    pub username: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thread {
    pub id: String,
    pub discussion_id: String,
    pub content: String,
    pub user: ThreadAuthor,
    pub like_count: u64,
    pub replies_count: u64,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastFive {
    pub users: Vec<UserProfile>,
    pub blogs: Vec<Blog>,
    pub threads: Vec<Thread>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    pub discussions: Counter,
    pub blogs: Counter,
    pub threads: Counter,
    pub users: Counter,
    #[serde(rename = "lastFive")]
    pub last_five: LastFive,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersPage {
    pub users: Vec<UserProfile>,
    pub total: u64,
    pub total_pages: u32,
    pub limit: u32,
    pub page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogsPage {
    pub data: Vec<BlogItem>,
    pub page: u32,
    pub total_pages: u32,
    pub total_blogs: u64,
    #[serde(rename = "topTags")]
    pub top_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

/// Body of `POST /users/profile/edit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileEdit {
    pub id: String,
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
    #[serde(rename = "publicId")]
    pub public_id: String,
    pub private: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileEdited {
    #[serde(rename = "newUser")]
    pub new_user: Option<UserProfile>,
}

/// Body of `POST /blogs/edit/{slug}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlogEdit {
    pub author_id: String,
    pub id: String,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<String>,
    pub title: String,
    pub content: String,
    pub html: String,
    pub tags: Vec<String>,
}

impl BlogEdit {
    /// Start from the current blog; callers overwrite what was edited.
    pub fn from_blog(blog: &Blog) -> Self {
        Self {
            author_id: blog.author.id.clone(),
            id: blog.id.clone(),
            cover_image: blog.cover_image.clone(),
            title: blog.title.clone(),
            content: blog.content.clone(),
            html: blog.html.clone(),
            tags: blog.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlogEdited {
    pub message: String,
    pub blog: Blog,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Acknowledged {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn users_page_decodes_backend_shape() {
        let page: UsersPage = serde_json::from_value(json!({
            "users": [{
                "id": "u1", "username": "ada", "email": "ada@x.io", "status": "BANNED",
                "role": "USER", "image": "", "profileImage": "http://img/p.png",
                "createdAt": "2024-01-15T10:00:00.000Z", "_count": {"threads": 3}
            }],
            "total": 41, "total_pages": 3, "limit": 20, "page": 1
        })).unwrap();
        assert_eq!(page.total_pages, 3);
        let u = &page.users[0];
        assert_eq!(u.status, UserStatus::Banned);
        assert_eq!(u.avatar(), Some("http://img/p.png"));
        assert_eq!(u.joined_on(), "2024-01-15");
        assert_eq!(u.counts.threads, 3);
    }

    #[test]
    fn blogs_page_reads_top_tags() {
        let page: BlogsPage = serde_json::from_value(json!({
            "data": [{"id": "b1", "slug": "first", "title": "First", "likes_count": 4}],
            "page": 2, "total_pages": 2, "total_blogs": 21, "topTags": ["rust", "film"]
        })).unwrap();
        assert_eq!(page.top_tags, vec!["rust", "film"]);
        assert_eq!(page.data[0].likes_count, 4);
    }

    #[test]
    fn blog_edit_serializes_backend_names() {
        let blog = Blog { id: "b".into(), slug: "s".into(), author: BlogAuthor { id: "a".into(), ..Default::default() }, ..Default::default() };
        let v = serde_json::to_value(BlogEdit::from_blog(&blog)).unwrap();
        assert_eq!(v["author_id"], "a");
        assert!(v.get("coverImage").is_some());
    }
}
