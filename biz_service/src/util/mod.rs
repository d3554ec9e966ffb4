pub mod group_name;
