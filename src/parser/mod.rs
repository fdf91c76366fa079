pub mod pattern_parser;
pub mod primitive_parser;
