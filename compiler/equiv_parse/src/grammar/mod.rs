//! Grammar productions, split by syntactic category.

mod expr;
mod stmt;
mod target;
