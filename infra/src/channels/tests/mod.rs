mod messaging_app_tests;
