pub mod archive;

pub use archive::{CommandArchive, DirectoryArchive, DisabledArchive};
