//! Low-level helpers for reading workbook sources: byte sources, ZIP parts and XML events.
pub(crate) mod reader;
pub(crate) mod xml;
pub(crate) mod zip;
