pub mod directory_file_offer;
