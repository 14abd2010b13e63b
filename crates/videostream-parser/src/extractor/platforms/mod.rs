pub mod videostream;
