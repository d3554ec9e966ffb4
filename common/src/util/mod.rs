pub mod date_util;
pub mod slug_util;
