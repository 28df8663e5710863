pub mod image_sequence_device;
