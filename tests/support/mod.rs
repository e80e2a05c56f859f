pub mod classgen;
