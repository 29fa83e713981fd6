
// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - generation_service: HTTP routes driven through the router
// - rsvp_mock: RSVP flows against a mock store that can fail on demand
// - smoke_tests: Basic wiring checks to ensure nothing is broken
