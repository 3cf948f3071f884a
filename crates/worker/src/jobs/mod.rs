pub mod crawl;
pub mod notify;

#[cfg(test)]
pub mod fakes;
