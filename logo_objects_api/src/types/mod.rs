mod list;
pub use self::list::ListResponse;
