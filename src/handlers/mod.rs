pub(crate) mod updater;
