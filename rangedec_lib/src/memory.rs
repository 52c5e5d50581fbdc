//! Address decoding: range table, masking and region selection

pub mod decoder;
pub mod mask;
pub mod range;
pub mod table;

#[cfg(test)]
mod test;
