pub mod delivery_writer;
