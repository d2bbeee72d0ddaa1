use rand::{distr::Alphanumeric, Rng};

pub fn get_test_key(i: usize) -> String {
  format!("kvlog-key-{:09}", i)
}

pub fn get_test_value(i: usize) -> String {
  let suffix: String = rand::rng()
    .sample_iter(&Alphanumeric)
    .take(16)
    .map(char::from)
    .collect();
  format!("kvlog-value-{:09}-{}", i, suffix)
}
