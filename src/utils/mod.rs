pub mod progress_bar_builder;
