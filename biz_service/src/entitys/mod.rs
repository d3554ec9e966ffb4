pub mod group_entity;
