mod alpha;
mod darray;
mod deletion;
mod stress;
