pub mod feature_testkit;
