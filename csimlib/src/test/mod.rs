mod io_tests;
mod trace_tests;
