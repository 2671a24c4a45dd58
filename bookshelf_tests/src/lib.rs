
#[cfg(all(test, feature = "load_tests"))]
mod load_test;
