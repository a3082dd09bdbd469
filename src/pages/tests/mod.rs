//! Whole-flow scenarios replayed against an [`OfflineSession`].

mod signin_tests;
