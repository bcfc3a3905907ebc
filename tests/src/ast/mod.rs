mod builder;
mod clone;
mod operators;
mod properties;
mod visit;
