/// Hands an encoded file to the user (download prompt, save to disk, ...).
pub trait FileOffer: Send {
    fn offer(&self, bytes: &[u8], file_name: &str) -> Result<(), Box<dyn std::error::Error>>;
}
