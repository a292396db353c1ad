//! Integration tests for the catalog: repositories, asset lifecycle, bulk
//! price adjustment and change feeds.


mod feed;
mod pricing;
mod repository;
