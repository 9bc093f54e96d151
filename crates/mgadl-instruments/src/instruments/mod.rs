pub mod mg_adl;
