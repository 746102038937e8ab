mod context;
mod engine;
mod ignore_rules;
mod node;
mod report;
mod snippets;
mod store;

// Language-specific doc extractors
mod languages;

// The only item consumed from outside this module tree.
pub use engine::Engine;
