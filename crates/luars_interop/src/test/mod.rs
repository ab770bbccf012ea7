pub mod test_multi_returns;
pub mod test_reconstruct;
