mod common;
mod history;
mod routing;
