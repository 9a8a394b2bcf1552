pub mod ungrouped;
