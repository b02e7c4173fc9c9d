pub mod entry_repo;
pub mod field_repo;
pub mod form_repo;
pub mod section_repo;

pub use entry_repo::EntryRepo;
pub use field_repo::FieldRepo;
pub use form_repo::FormRepo;
pub use section_repo::SectionRepo;
