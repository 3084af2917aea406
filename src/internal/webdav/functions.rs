pub mod propfind;
