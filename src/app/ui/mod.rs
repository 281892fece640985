mod details;
pub(super) mod fps;
mod panels;
pub(super) mod search;
