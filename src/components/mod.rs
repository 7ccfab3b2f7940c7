pub mod constellation;
