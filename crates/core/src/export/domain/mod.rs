pub mod file_offer;
