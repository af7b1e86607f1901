pub mod status_table_writer;
