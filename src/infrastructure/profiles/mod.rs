pub mod letterboxd;
