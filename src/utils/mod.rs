pub(crate) mod fanout;
