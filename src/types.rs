/// Canonical acronym key (trimmed, uppercased); doubles as the store
/// document id. Examples: `API`, `SLA`
pub type AcronymKey = String;
/// Definition text as entered (trimmed, case preserved).
/// Example: `Application Programming Interface`
pub type DefinitionText = String;
/// Owning-team label as entered (trimmed, case preserved).
/// Examples: `Platform`, `Field Ops`
pub type TeamName = String;
/// Name of a store collection holding acronym documents.
/// Example: `acronyms`
pub type CollectionName = String;
