/// Database models for Conduit
///
/// Each model owns its PostgreSQL queries (used by
/// [`crate::store::postgres::PgStore`]) and the JSON representation the
/// handlers return.
///
/// # Models
///
/// - `user`: User accounts, the follow relation, `UserView` and `Profile`
/// - `article`: Articles, favorites, listing filters and `ArticleView`
/// - `comment`: Comments and `CommentView`
/// - `tag`: Tags and tag-name normalisation

pub mod article;
pub mod comment;
pub mod tag;
pub mod user;
